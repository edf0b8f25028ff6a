mod tests_persistence;
mod tests_search_scan;
