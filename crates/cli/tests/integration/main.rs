mod build_tests;
mod common;
mod ids_tests;
mod inspect_tests;
