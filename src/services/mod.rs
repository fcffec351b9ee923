pub mod gas;
pub mod wallet;
