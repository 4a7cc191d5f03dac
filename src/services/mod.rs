pub(crate) mod quiz_def;
pub(crate) mod quiz_delivery;
pub(crate) mod quiz_grading;
pub(crate) mod quiz_scoring;
