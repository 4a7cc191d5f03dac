pub(crate) mod courses;
pub(crate) mod submissions;
pub(crate) mod users;
