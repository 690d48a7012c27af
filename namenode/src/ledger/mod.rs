pub mod default_ledger;
pub mod recorder;
