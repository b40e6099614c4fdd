mod test_auth_gate;
mod test_call_scenario;
