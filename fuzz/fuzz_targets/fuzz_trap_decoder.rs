#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use async_snmp_trap::ber::Decoder;
use async_snmp_trap::pdu::{Pdu, TrapV1Pdu};
use async_snmp_trap::{BerTrapDecoder, TrapDecoder};

fuzz_target!(|data: &[u8]| {
    // The full datagram path used by the listener
    let (packet, err) = BerTrapDecoder.decode(data);
    if err.is_none() {
        let _ = BerTrapDecoder.decode(&packet.encode());
    }
    let _ = packet.to_string();
    let _ = packet.trap_oid();

    let bytes = Bytes::copy_from_slice(data);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = Pdu::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes);
    let _ = TrapV1Pdu::decode_header(&mut decoder);
});
