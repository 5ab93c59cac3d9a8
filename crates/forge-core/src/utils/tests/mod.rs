mod fs_tests;
mod path_tests;
