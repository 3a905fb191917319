pub mod task;
pub mod user;

#[cfg(test)]
pub mod test_util;
