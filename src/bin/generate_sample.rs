use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const DEFAULT_OUTPUT: &str = "updated_used_car.csv";
const DEFAULT_ROWS: usize = 2000;

static HEADER: [&str; 12] = [
    "Car_id",
    "Date",
    "Customer Name",
    "Dealer_Name",
    "Brand",
    "Model",
    "Transmission",
    "Price",
    "Dealer_No",
    "Body Style",
    "Dealer_Region",
    "Price_category",
];

/// Brand, base price, models.
static BRANDS: [(&str, f64, [&str; 2]); 14] = [
    ("Cadillac", 38000.0, ["Eldorado", "Escalade"]),
    ("Lexus", 36000.0, ["ES300", "LS400"]),
    ("Mercedes-B", 35000.0, ["C-Class", "E-Class"]),
    ("BMW", 33000.0, ["323i", "528i"]),
    ("Lincoln", 31000.0, ["Navigator", "Town car"]),
    ("Audi", 30000.0, ["A4", "A6"]),
    ("Jeep", 26000.0, ["Cherokee", "Wrangler"]),
    ("Ford", 24000.0, ["Explorer", "Taurus"]),
    ("Chevrolet", 23000.0, ["Malibu", "Silverado"]),
    ("Toyota", 22000.0, ["Camry", "Corolla"]),
    ("Honda", 21000.0, ["Accord", "Civic"]),
    ("Nissan", 20000.0, ["Altima", "Sentra"]),
    ("Hyundai", 17000.0, ["Elantra", "Sonata"]),
    ("Saturn", 15000.0, ["SL", "LS"]),
];

static REGIONS: [&str; 7] = [
    "Austin",
    "Janesville",
    "Scottsdale",
    "Pasco",
    "Aurora",
    "Middletown",
    "Greenville",
];

static BODY_STYLES: [(&str, f64); 5] = [
    ("SUV", 1.15),
    ("Sedan", 1.0),
    ("Hatchback", 0.85),
    ("Passenger", 0.95),
    ("Hardtop", 1.05),
];

static FIRST_NAMES: [&str; 8] = [
    "Geraldine", "Gia", "Gianna", "Giselle", "Grace", "Guadalupe", "Hailey", "Graham",
];

static DEALERS: [(&str, &str); 6] = [
    ("Buddy Storbeck's Diesel Service Inc", "60504-7114"),
    ("C & M Motors Inc", "38701-8047"),
    ("Capitol KIA", "99301-3882"),
    ("Chrysler of Tri-Cities", "53546-9427"),
    ("Classic Chevy", "78758-7841"),
    ("Progressive Shippers Cooperative Association No", "85257-3102"),
];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn price_category(price: i64) -> &'static str {
    match price {
        p if p < 15_000 => "Budget",
        p if p < 30_000 => "Mid-Range",
        _ => "Luxury",
    }
}

/// One sale as text fields, in `HEADER` order.
fn sale(rng: &mut SimpleRng, index: usize) -> [String; 12] {
    let (brand, base, models) = rng.pick(&BRANDS);
    let (body, factor) = rng.pick(&BODY_STYLES);
    let (dealer, dealer_no) = rng.pick(&DEALERS);
    let price = rng.gauss(base * factor, base * 0.25).max(1_200.0).round() as i64;
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    let year = 2022 + rng.below(2);

    [
        format!("C_CND_{index:06}"),
        format!("{month}/{day}/{year}"),
        rng.pick(&FIRST_NAMES).to_string(),
        dealer.to_string(),
        brand.to_string(),
        rng.pick(models).to_string(),
        if rng.next_f64() < 0.53 { "Auto" } else { "Manual" }.to_string(),
        price.to_string(),
        dealer_no.to_string(),
        body.to_string(),
        rng.pick(&REGIONS).to_string(),
        price_category(price).to_string(),
    ]
}

fn write_csv(path: &Path, rows: &[[String; 12]]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[[String; 12]]) -> anyhow::Result<()> {
    // Price is the only typed column; the rest are strings.
    let price_idx = 7;
    let fields: Vec<Field> = HEADER
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let dtype = if i == price_idx { DataType::Int64 } else { DataType::Utf8 };
            Field::new(*name, dtype, false)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(HEADER.len());
    for i in 0..HEADER.len() {
        if i == price_idx {
            let prices = rows
                .iter()
                .map(|r| r[i].parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .context("Generated price is not an integer")?;
            arrays.push(Arc::new(Int64Array::from(prices)));
        } else {
            let values: Vec<&str> = rows.iter().map(|r| r[i].as_str()).collect();
            arrays.push(Arc::new(StringArray::from(values)));
        }
    }

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .context("Failed to create RecordBatch")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string()));
    let count = match args.next() {
        Some(n) => n
            .parse::<usize>()
            .with_context(|| format!("Row count must be a positive integer, got {n:?}"))?,
        None => DEFAULT_ROWS,
    };
    if count == 0 {
        bail!("Row count must be at least 1");
    }

    let mut rng = SimpleRng::new(42);
    let rows: Vec<[String; 12]> = (0..count).map(|i| sale(&mut rng, i)).collect();

    let is_parquet = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&output, &rows)?;
    } else {
        write_csv(&output, &rows)?;
    }

    println!("Wrote {count} sales to {}", output.display());
    Ok(())
}
