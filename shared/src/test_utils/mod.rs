pub mod counting_store;
pub mod faulty_store;
pub mod test_logging;
