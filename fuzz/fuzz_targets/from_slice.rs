#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate dnsclient;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must encode, and decode again to the same message.
    if let Ok(m) = dnsclient::Message::from_slice(data) {
        let buf = m.to_vec().expect("decoded message failed to encode");
        let again = dnsclient::Message::from_slice(&buf).expect("encoded message failed to decode");
        assert_eq!(m, again);
    }
});
