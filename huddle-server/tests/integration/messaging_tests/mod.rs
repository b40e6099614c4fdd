mod test_sender_id_is_stamped;
