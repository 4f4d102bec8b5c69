mod json_content_tests;
