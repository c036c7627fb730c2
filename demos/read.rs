use pm_sensors::*;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("Missing path to device");
    let sensor: Sensor = args
        .next()
        .map(|name| name.parse().unwrap())
        .unwrap_or_default();

    println!("Connecting to: {}", path);

    let device = linux_embedded_hal::Serial::open(std::path::Path::new(&path)).unwrap();
    let config = Config {
        sensor,
        ..Config::default()
    };
    let mut session = Session::open(HalChannel::new(device), config).unwrap();
    println!("Found {}", session.sensor());

    for obs in session.read(60) {
        match obs {
            Ok(obs) => println!("{}", obs),
            Err(e) => println!("{}", e),
        }
    }
}
