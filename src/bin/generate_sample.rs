//! Writes `sample_data.csv`, a small inventory table for trying out csv2doc:
//!
//! ```bash
//! cargo run --bin generate_sample
//! cargo run -- sample_data.csv -f html --sort-by category --group-by category
//! ```

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let categories = ["Fruit", "Vegetable", "Dairy", "Bakery"];
    let items = [
        ("Fruit", ["Apple", "Banana", "Cherry"]),
        ("Vegetable", ["Carrot", "Leek", "Onion"]),
        ("Dairy", ["Butter", "Cheese", "Yoghurt"]),
        ("Bakery", ["Bagel", "Baguette", "Croissant"]),
    ];
    let warehouses = ["North", "South"];
    let statuses = ["in stock", "low", "reorder"];

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["sku", "item", "category", "warehouse", "quantity", "status", "note"])?;

    let mut rows = 0;
    for n in 0..40 {
        let category = rng.pick(&categories);
        let names = items
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, names)| names)
            .context("unknown category")?;
        let item = rng.pick(names);
        let quantity = (rng.next_u64() % 250).to_string();
        // a few notes with commas and quotes to exercise CSV quoting
        let note = match n % 10 {
            3 => "fragile, keep upright".to_string(),
            7 => "supplier says \"late\"".to_string(),
            _ => String::new(),
        };
        writer.write_record([
            format!("SKU-{n:04}").as_str(),
            item,
            category,
            rng.pick(&warehouses),
            quantity.as_str(),
            rng.pick(&statuses),
            note.as_str(),
        ])?;
        rows += 1;
    }
    writer.flush()?;

    println!("Wrote {rows} rows to {output_path}");
    Ok(())
}
