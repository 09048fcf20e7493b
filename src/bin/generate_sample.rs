use std::fs::File;
use std::io::{BufWriter, Write};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Format a float with a comma decimal separator, like locale-formatted
/// exports the viewer has to cope with.
fn comma_decimal(v: f64) -> String {
    format!("{v:.4}").replace('.', ",")
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let output_path = "sample_data.csv";
    let file = File::create(output_path).expect("Failed to create output file");
    let mut out = BufWriter::new(file);

    // Header row, then the unit row the viewer treats as labels.
    writeln!(out, "time;signal;noisy;ramp").unwrap();
    writeln!(out, "s;V;V;m").unwrap();

    let samples = 500;
    for i in 0..samples {
        let t = i as f64 * 0.01;
        let signal = (2.0 * std::f64::consts::PI * 1.5 * t).sin();
        let noisy = signal + rng.gauss(0.0, 0.05);
        let ramp = 0.3 * t;
        writeln!(
            out,
            "{};{};{};{}",
            comma_decimal(t),
            comma_decimal(signal),
            comma_decimal(noisy),
            comma_decimal(ramp)
        )
        .unwrap();
    }

    out.flush().unwrap();
    println!("Wrote {samples} rows to {output_path}");
}
