mod test_send_message;
