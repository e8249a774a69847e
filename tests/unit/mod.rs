mod basic_tests;
mod streak_scenarios;
