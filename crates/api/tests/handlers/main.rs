mod availability_test;
mod middleware_test;
mod test_utils;
mod tutoring_test;
