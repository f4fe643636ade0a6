mod config_tests;
