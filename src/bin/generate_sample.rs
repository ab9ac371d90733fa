use anyhow::{Context, Result};

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

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // (group, mean height cm, mean weight kg)
    let groups = [("A", 165.0, 60.0), ("B", 172.0, 71.0), ("C", 180.0, 82.0)];
    let rows_per_group = 200;

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;
    writer
        .write_record(["id", "height", "weight", "group"])
        .context("writing header")?;

    let mut row_id: u64 = 0;
    for &(group, height_mean, weight_mean) in &groups {
        for _ in 0..rows_per_group {
            let height = rng.gauss(height_mean, 7.0);
            let weight = rng.gauss(weight_mean, 9.0);
            writer
                .write_record([
                    row_id.to_string(),
                    format!("{height:.1}"),
                    format!("{weight:.1}"),
                    group.to_string(),
                ])
                .with_context(|| format!("writing row {row_id}"))?;
            row_id += 1;
        }
    }
    writer.flush().context("flushing output file")?;

    println!("Wrote {row_id} rows to {output_path}");
    Ok(())
}
