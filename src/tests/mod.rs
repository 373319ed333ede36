mod test_output;
