mod ancestor_tests;
mod scenario_tests;
