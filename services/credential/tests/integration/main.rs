mod helpers;
mod rotation_test;
