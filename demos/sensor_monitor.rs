use rmw_lite::{
    Guid, MessageInfo, Sample, SampleKind, SerializedMessage, SubscriptionConfig, Transport,
    TransportConfig,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TOPIC: &str = "/temperature";

#[derive(Serialize, Deserialize, Debug, Default)]
struct TemperatureReading {
    sensor_id: String,
    temperature: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let threshold: f64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(30.0);

    let transport = match Transport::new(TransportConfig::default()) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            println!("Failed to create transport: {}", e);
            return;
        }
    };

    let monitor = match transport.create_bincode_subscription::<TemperatureReading>(
        SubscriptionConfig::new(TOPIC),
    ) {
        Ok(sub) => sub,
        Err(e) => {
            println!("Failed to subscribe: {}", e);
            return;
        }
    };
    let recorder = match transport.create_bincode_subscription::<TemperatureReading>(
        SubscriptionConfig::new(TOPIC),
    ) {
        Ok(sub) => sub,
        Err(e) => {
            println!("Failed to subscribe: {}", e);
            return;
        }
    };

    let sensor = {
        let transport = Arc::clone(&transport);
        thread::spawn(move || run_sensor(&transport))
    };

    let mut reading = TemperatureReading::default();
    let mut message_info = MessageInfo::default();
    let mut raw = SerializedMessage::new();
    let mut idle_polls = 0;

    while idle_polls < 50 {
        match monitor.take_with_info(&mut reading, &mut message_info) {
            Ok(true) => {
                idle_polls = 0;
                info!(
                    "Sensor {} - Temperature: {:.1} (seq {})",
                    reading.sensor_id,
                    reading.temperature,
                    message_info.publication_sequence_number
                );
                if reading.temperature > threshold {
                    warn!(
                        "High temperature detected: {:.1} from sensor {}",
                        reading.temperature, reading.sensor_id
                    );
                }
            }
            Ok(false) => {
                idle_polls += 1;
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => println!("Error taking reading: {}", e),
        }

        while let Ok(true) = recorder.take_serialized(&mut raw) {
            info!("Recorded {} raw bytes", raw.len());
        }
    }

    if sensor.join().is_err() {
        println!("Sensor thread panicked");
    }
    println!("{:?}", transport.stats());
}

fn run_sensor(transport: &Transport) {
    let writer = Guid::new();
    for seq in 0..10u64 {
        let reading = TemperatureReading {
            sensor_id: "probe-1".to_string(),
            temperature: 25.0 + seq as f64,
        };
        match bincode::serialize(&reading) {
            Ok(payload) => {
                transport.deliver(TOPIC, Sample::alive(writer, seq, payload));
            }
            Err(e) => println!("Failed to serialize reading: {}", e),
        }
        thread::sleep(Duration::from_millis(50));
    }
    transport.deliver(TOPIC, Sample::not_alive(writer, 10, SampleKind::NotAliveDisposed));
}
