mod support;

mod email_tests;
