//! Open a device by path, send one output report, print input reports.
//!
//! ```text
//! cargo run --example echo -- /dev/hidraw3 00 01 02
//! ```

use std::time::Duration;

use hidlink::{Device, Manager};

fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next().expect("usage: echo <path> [hex bytes...]");
    let report: Vec<u8> = args
        .map(|b| u8::from_str_radix(&b, 16).expect("hex byte"))
        .collect();

    let mgr = Manager::new().expect("init hidapi");
    let info = mgr.by_path(&path).expect("no such device");
    println!("{info}");

    let mut dev = mgr.open(&info).expect("open device");
    if !report.is_empty() {
        dev.write(&report).expect("write report");
    }

    let rx = dev.read_channel().expect("start read loop");
    for _ in 0..10 {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(data) => println!("{} bytes: {:02x?}", data.len(), data),
            Err(_) => break,
        }
    }
    if let Some(e) = dev.take_read_error() {
        eprintln!("{e}");
    }
    dev.close();
}
