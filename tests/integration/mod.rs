mod basic_integration;
mod protocol_session;
