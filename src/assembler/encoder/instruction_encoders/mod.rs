pub mod alu;
pub mod branch;
pub mod load;
pub mod semaphore;
