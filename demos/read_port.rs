use std::time::Duration;

use pm_sensors::*;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("Missing path to device");
    let sensor: Sensor = args
        .next()
        .map(|name| name.parse().unwrap())
        .unwrap_or_default();
    let interval: u64 = args.next().map(|s| s.parse().unwrap()).unwrap_or(60);

    println!("Connecting to: {} at {} baud", path, sensor.baud());

    let config = Config {
        sensor,
        reply_timeout: Some(Duration::from_secs(5)),
        ..Config::default()
    };
    let channel = SerialPortChannel::new(path, sensor.baud());
    let mut session = Session::open(channel, config).unwrap();
    println!("Found {}", session.sensor());

    for obs in session.read(interval).take(10) {
        match obs {
            Ok(obs) => println!("{}", obs),
            Err(e) => println!("{}", e),
        }
    }

    session.close().unwrap();
}
