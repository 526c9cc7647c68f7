pub mod careers;
