use rand::Rng;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const USE_DATA: bool = false;

const LABELS: &str = "Ax, Ay, Az, A";
const SAMPLE_PERIOD_MS: u64 = 10;

// -----------------------------------------------------------------------------
// SETUP FOR REPLAYING RECORDED SENSOR DATA FROM CSV
// -----------------------------------------------------------------------------

const NUM_CHANNELS: usize = 4;

fn read_channels_from_csv(file_path: &str) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    let mut rdr = csv::Reader::from_reader(File::open(file_path)?);
    let mut data: Vec<Vec<f64>> = vec![Vec::new(); NUM_CHANNELS];

    for result in rdr.records() {
        let record = result?;
        for (index, value) in record.iter().take(NUM_CHANNELS).enumerate() {
            data[index].push(value.parse()?);
        }
    }

    Ok(data)
}

// -----------------------------------------------------------------------------
// RUN CODE
// -----------------------------------------------------------------------------

pub fn run() -> std::io::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:8080")?;
    log::info!("sensor simulator listening on 127.0.0.1:8080");

    let recorded = if USE_DATA {
        Arc::new(read_channels_from_csv("data/acc.csv").expect("failed to read data/acc.csv"))
    } else {
        Arc::new(Vec::new())
    };

    for stream in listener.incoming() {
        let stream = stream?;

        if USE_DATA {
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || {
                if let Err(e) = replay_loop(stream, recorded) {
                    log::warn!("replay connection ended: {}", e);
                }
            });
        } else {
            thread::spawn(move || {
                if let Err(e) = simulated_loop(stream) {
                    log::warn!("simulated connection ended: {}", e);
                }
            });
        }
    }

    Ok(())
}

fn write_record(stream: &mut TcpStream, ax: f64, ay: f64, az: f64) -> std::io::Result<()> {
    let a = (ax * ax + ay * ay + az * az).sqrt();
    writeln!(stream, "{LABELS} : {ax:.3}, {ay:.3}, {az:.3}, {a:.3}")
}

// -----------------------------------------------------------------------------
// REPLAYING RECORDED DATA
// -----------------------------------------------------------------------------

fn replay_loop(mut stream: TcpStream, data: Arc<Vec<Vec<f64>>>) -> std::io::Result<()> {
    let samples = data.first().map_or(0, Vec::len);
    for i in 0..samples {
        write_record(&mut stream, data[0][i], data[1][i], data[2][i])?;
        thread::sleep(Duration::from_millis(SAMPLE_PERIOD_MS));
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// SIMULATING A ROD-TIP SENSOR
// -----------------------------------------------------------------------------

const GRAVITY: f64 = 9.81;
const NOISE_AMPLITUDE: f64 = 0.05;
const SWAY_FREQ: f64 = 0.8;
const SWAY_AMPLITUDE: f64 = 0.2;
const INCREMENT_TIME: f64 = 0.01;

#[derive(Debug)]
struct BiteParams {
    amplitude: f64,
    frequency: f64,
    iterations: usize,
}

impl BiteParams {
    fn new(amplitude: f64, frequency: f64, iterations: usize) -> Self {
        Self {
            amplitude,
            frequency,
            iterations,
        }
    }
}

fn simulated_loop(mut stream: TcpStream) -> std::io::Result<()> {
    let mut rng = rand::thread_rng();
    let mut time = 0.0f64;
    let mut bite: Option<(BiteParams, usize, f64)> = None;

    loop {
        // Gentle sway plus sensor noise around the gravity baseline.
        let mut ax = SWAY_AMPLITUDE * (SWAY_FREQ * time).sin() + rng.gen_range(-1.0..1.0) * NOISE_AMPLITUDE;
        let mut ay = SWAY_AMPLITUDE * (SWAY_FREQ * time * 0.7).cos() + rng.gen_range(-1.0..1.0) * NOISE_AMPLITUDE;
        let mut az = GRAVITY + rng.gen_range(-1.0..1.0) * NOISE_AMPLITUDE;

        // Superimpose an ongoing bite pulse, if any.
        if let Some((params, step, phase)) = &mut bite {
            let jerk =
                params.amplitude * (2.0 * std::f64::consts::PI * params.frequency * *phase).sin();
            ax += jerk;
            ay += jerk * 0.5;
            az += jerk;
            *phase += INCREMENT_TIME;
            *step += 1;
            if *step >= params.iterations {
                bite = None;
            }
        } else if rng.gen_range(0..1000) < 5 {
            // Occasional strike: a short sinusoidal jerk burst.
            let params = match rng.gen_range(0..2) {
                0 => BiteParams::new(2.0, 6.0, 40),
                _ => BiteParams::new(5.0, 10.0, 25),
            };
            bite = Some((params, 0, 0.0));
        }

        write_record(&mut stream, ax, ay, az)?;

        thread::sleep(Duration::from_millis(SAMPLE_PERIOD_MS));
        time += INCREMENT_TIME;
    }
}
