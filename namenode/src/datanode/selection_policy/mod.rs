pub mod default_selection_policy;
pub mod selection_policy;
