//! Common test fixtures: trap datagrams, senders and a listener harness.

use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use async_snmp_trap::ber::EncodeBuf;
use async_snmp_trap::notification::oids;
use async_snmp_trap::pdu::{Pdu, PduType, TrapV1Pdu};
use async_snmp_trap::{Oid, TrapHandler, TrapListener, TrapPacket, Value, VarBind, oid};
use tokio_util::sync::CancellationToken;

/// How long to wait for something that should happen.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to wait before concluding something did not happen.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

pub const COMMUNITY: &[u8] = b"public";

// =============================================================================
// Notification OIDs
// =============================================================================

/// linkDown (SNMPv2-MIB snmpTraps.3)
pub fn link_down() -> Oid {
    oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3)
}

/// ifIndex.1
pub fn if_index_1() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1)
}

/// A private enterprise used for v1 traps.
pub fn test_enterprise() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 99999, 1)
}

// =============================================================================
// Datagram builders
// =============================================================================

/// SNMPv2c notification of `pdu_type` with the standard leading varbinds.
pub fn v2c_notification(pdu_type: PduType, request_id: i32, trap_oid: Oid, uptime: u32) -> Vec<u8> {
    let varbinds = vec![
        VarBind::new(oids::sys_uptime(), Value::TimeTicks(uptime)),
        VarBind::new(oids::snmp_trap_oid(), Value::ObjectIdentifier(trap_oid)),
        VarBind::new(if_index_1(), Value::Integer(1)),
    ];
    let pdu = Pdu::notification(pdu_type, request_id, varbinds);
    let mut buf = EncodeBuf::new();
    buf.push_community_message(1, COMMUNITY, |buf| pdu.encode(buf));
    buf.finish().to_vec()
}

/// SNMPv2c linkDown trap.
pub fn v2c_trap(request_id: i32) -> Vec<u8> {
    v2c_notification(PduType::TrapV2, request_id, link_down(), 4200)
}

/// SNMPv1 enterprise-specific trap.
pub fn v1_trap(specific: i32) -> Vec<u8> {
    let header = TrapV1Pdu {
        enterprise: test_enterprise(),
        agent_addr: [192, 0, 2, 10],
        generic_trap: 6,
        specific_trap: specific,
        time_stamp: 100,
    };
    let varbinds = [VarBind::new(if_index_1(), Value::Integer(7))];
    let mut buf = EncodeBuf::new();
    buf.push_community_message(0, COMMUNITY, |buf| header.encode(buf, &varbinds));
    buf.finish().to_vec()
}

/// Bytes that are not an SNMP message at all.
pub fn garbage() -> Vec<u8> {
    b"\x00\x01 this is not BER \xff\xfe".to_vec()
}

// =============================================================================
// Senders
// =============================================================================

/// A UDP socket bound to an ephemeral loopback port.
pub fn sender() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").expect("bind sender")
}

/// Send one datagram from a fresh socket, returning the socket's address.
pub fn send_once(target: SocketAddr, data: &[u8]) -> SocketAddr {
    let socket = sender();
    socket.send_to(data, target).expect("send datagram");
    socket.local_addr().expect("sender address")
}

// =============================================================================
// Handlers
// =============================================================================

/// A handler forwarding every packet to a channel.
pub fn channel_handler() -> (impl TrapHandler, mpsc::Receiver<(TrapPacket, SocketAddr)>) {
    let (tx, rx) = mpsc::channel();
    let handler = move |packet: TrapPacket, source: SocketAddr| {
        let _ = tx.send((packet, source));
    };
    (handler, rx)
}

// =============================================================================
// Listener harness
// =============================================================================

/// Send listener diagnostics to the test output (filter with RUST_LOG).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A listener running on its own thread and runtime.
///
/// The thread keeps its own runtime so handlers that block do not stall the
/// test.
pub struct RunningListener {
    pub addr: SocketAddr,
    token: CancellationToken,
    thread: Option<JoinHandle<async_snmp_trap::Result<()>>>,
}

impl RunningListener {
    /// Start `listener` on an ephemeral loopback port.
    pub fn start(listener: TrapListener) -> Self {
        Self::start_on(listener, "127.0.0.1:0").expect("start listener")
    }

    /// Start `listener` on `addr`, returning the setup error if binding fails.
    pub fn start_on(listener: TrapListener, addr: &str) -> async_snmp_trap::Result<Self> {
        init_tracing();
        let token = CancellationToken::new();
        let run_token = token.clone();
        let addr = addr.to_owned();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build runtime");
            runtime.block_on(async move {
                match listener.bind(&addr).await {
                    Ok(bound) => {
                        let _ = ready_tx.send(Ok(bound.local_addr()));
                        bound.run(run_token).await
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        Ok(())
                    }
                }
            })
        });

        let addr = ready_rx.recv().expect("listener thread died")?;
        Ok(Self {
            addr,
            token,
            thread: Some(thread),
        })
    }

    /// Cancel the listener and wait for its loop to return.
    pub fn stop(mut self) -> async_snmp_trap::Result<()> {
        self.token.cancel();
        self.thread
            .take()
            .expect("listener already stopped")
            .join()
            .expect("listener thread panicked")
    }
}

impl Drop for RunningListener {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
