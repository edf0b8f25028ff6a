mod tests_run_io;
