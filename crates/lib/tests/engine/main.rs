mod builder_tests;
mod manifest_tests;
