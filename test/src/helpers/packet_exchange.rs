use netbind_shared::{RpcReport, UpdateReport};

use super::test_host::TestHost;

/// Send `from`'s pending updates and apply every packet on `to`
pub fn exchange_updates(from: &mut TestHost, to: &mut TestHost) -> UpdateReport {
    from.manager.send_updates(&mut from.connection);

    let mut report = UpdateReport::default();
    while let Some(packet) = to.connection.receive() {
        let read = to
            .manager
            .read_updates(&packet)
            .expect("update packet framing should be valid");
        report.applied.extend(read.applied);
        report.dropped.extend(read.dropped);
        report.failed.extend(read.failed);
    }
    report
}

/// Send `from`'s queued RPCs and deliver every packet on `to`
pub fn exchange_rpcs(from: &mut TestHost, to: &mut TestHost) -> RpcReport {
    from.manager.send_rpcs(&mut from.connection);

    let mut report = RpcReport::default();
    while let Some(packet) = to.connection.receive() {
        let read = to
            .manager
            .read_rpcs(&to.connection, &packet)
            .expect("RPC packet framing should be valid");
        report.handled += read.handled;
        report.unrecognized += read.unrecognized;
        report.dropped += read.dropped;
    }
    report
}

/// Run `n` update exchanges, as `n` ticks with no mutation in between
pub fn tick_and_exchange(from: &mut TestHost, to: &mut TestHost, n: usize) -> Vec<UpdateReport> {
    (0..n).map(|_| exchange_updates(from, to)).collect()
}
