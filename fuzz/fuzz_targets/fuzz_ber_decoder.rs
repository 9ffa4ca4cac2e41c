#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use async_snmp_trap::ber::{Decoder, tag};
use async_snmp_trap::value::Value;
use async_snmp_trap::varbind::decode_varbind_list;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);
    let fresh = || Decoder::new(bytes.clone());

    let _ = fresh().read_integer();
    let _ = fresh().read_unsigned32(tag::application::TIMETICKS);
    let _ = fresh().read_integer64();
    let _ = fresh().read_octet_string();
    let _ = fresh().read_oid();
    let _ = fresh().read_ip_address();
    let _ = fresh().read_any();
    let _ = Value::decode(&mut fresh());

    // Walk a trap PDU body the way the decoder does
    for pdu_tag in [tag::pdu::TRAP_V1, tag::pdu::TRAP_V2] {
        let mut outer = fresh();
        if let Ok(mut pdu) = outer.read_constructed(pdu_tag) {
            while !pdu.is_empty() {
                if pdu.peek_tag() == Some(tag::universal::SEQUENCE) {
                    let _ = decode_varbind_list(&mut pdu);
                    break;
                }
                if pdu.read_any().is_err() {
                    break;
                }
            }
        }
    }
});
