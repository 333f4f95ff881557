/// Writes a deterministic synthetic passenger CSV for demos and manual
/// testing. The shape mirrors the canonical Titanic header, including
/// realistic missingness in Age, Cabin and Embarked.
use std::error::Error;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const SURNAMES: [&str; 12] = [
    "Andersson", "Becker", "Connolly", "Dawson", "Eriksson", "Fleming", "Goldsmith", "Harper",
    "Ivanov", "Johnson", "Kelly", "Larsson",
];
const MALE_NAMES: [&str; 6] = ["William", "John", "Patrick", "Erik", "Thomas", "Charles"];
const FEMALE_NAMES: [&str; 6] = ["Margaret", "Anna", "Bridget", "Elin", "Mary", "Catherine"];
const DECKS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
const PORTS: [&str; 3] = ["C", "Q", "S"];

fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = SimpleRng::new(42);

    let output_path = "sample_passengers.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record([
        "PassengerId",
        "Survived",
        "Pclass",
        "Name",
        "Sex",
        "Age",
        "SibSp",
        "Parch",
        "Ticket",
        "Fare",
        "Cabin",
        "Embarked",
    ])?;

    let total = 200;
    for id in 1..=total {
        let pclass = *rng.pick(&[1, 2, 2, 3, 3, 3]);
        let is_female = rng.chance(0.4);
        let sex = if is_female { "female" } else { "male" };

        let (first, title) = if is_female {
            let married = rng.chance(0.5);
            (
                *rng.pick(&FEMALE_NAMES),
                if married { "Mrs" } else { "Miss" },
            )
        } else {
            (*rng.pick(&MALE_NAMES), "Mr")
        };
        let name = format!("{}, {title}. {first}", rng.pick(&SURNAMES));

        // First class skews older and richer.
        let age_mean = match pclass {
            1 => 40.0,
            2 => 32.0,
            _ => 26.0,
        };
        let age = if rng.chance(0.8) {
            Some(rng.gauss(age_mean, 12.0).clamp(0.5, 80.0).round())
        } else {
            None
        };

        let sib_sp = (rng.next_u64() % 3) as i64;
        let parch = (rng.next_u64() % 3) as i64;

        let fare_mean = match pclass {
            1 => 84.0,
            2 => 21.0,
            _ => 13.0,
        };
        let fare = rng.gauss(fare_mean, fare_mean / 3.0).max(4.0);

        let cabin = if pclass == 1 && rng.chance(0.7) {
            Some(format!("{}{}", rng.pick(&DECKS), 1 + rng.next_u64() % 120))
        } else {
            None
        };

        let embarked = if rng.chance(0.98) {
            Some(*rng.pick(&PORTS))
        } else {
            None
        };

        // Survival odds follow the dataset's sex/class gradient.
        let survival_p = match (is_female, pclass) {
            (true, 1) => 0.95,
            (true, 2) => 0.85,
            (true, _) => 0.55,
            (false, 1) => 0.35,
            (false, 2) => 0.15,
            (false, _) => 0.12,
        };
        let survived = i64::from(rng.chance(survival_p));

        let ticket = format!("{}", 100_000 + rng.next_u64() % 300_000);

        writer.write_record([
            id.to_string(),
            survived.to_string(),
            pclass.to_string(),
            name,
            sex.to_string(),
            age.map(|a| format!("{a:.1}")).unwrap_or_default(),
            sib_sp.to_string(),
            parch.to_string(),
            ticket,
            format!("{fare:.4}"),
            cabin.unwrap_or_default(),
            embarked.map(str::to_string).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {total} passengers to {output_path}");
    Ok(())
}
