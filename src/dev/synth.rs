//! Realistic-looking synthetic customers: names from word lists, emails built from the same
//! first and last name, ages uniform in `[18, 80]`.

use crate::model::NewCustomer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<i32> = 18..=80;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Christopher", "Karen", "Charles", "Lisa", "Daniel", "Nancy", "Matthew", "Betty", "Anthony",
    "Sandra", "Mark", "Margaret", "Donald", "Ashley", "Steven", "Kimberly", "Andrew", "Emily",
    "Paul", "Donna", "Joshua", "Michelle", "Kenneth", "Carol", "Kevin", "Amanda", "Brian",
    "Melissa", "George", "Deborah", "Timothy", "Stephanie", "Ronald", "Rebecca", "Jason", "Laura",
    "Edward", "Sharon", "Jeffrey", "Cynthia", "Ryan", "Kathleen", "Jacob", "Amy", "Gary", "Angela",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez", "Clark",
    "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright", "Scott", "Torres",
    "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera", "Campbell",
    "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans", "Turner", "Diaz", "Parker",
    "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris", "Morales", "Murphy",
];

const PREFIXES: &[&str] = &["Mr.", "Mrs.", "Ms.", "Dr.", "Miss"];
const SUFFIXES: &[&str] = &["Jr.", "MD", "PhD", "DDS", "DVM", "II", "III"];

const WORDS: &[&str] = &[
    "amber", "atlas", "birch", "cedar", "cobalt", "coral", "delta", "ember", "falcon", "fern",
    "harbor", "indigo", "juniper", "lark", "maple", "meadow", "nova", "onyx", "orchid", "pine",
    "quartz", "raven", "river", "sage", "sierra", "summit", "tidal", "willow", "zephyr", "aspen",
];

const DOMAINS: &[&str] = &[
    "example.com", "example.org", "example.net", "gmail.com", "yahoo.com", "hotmail.com",
    "outlook.com", "icloud.com", "proton.me", "mail.com",
];

/// Anything that can produce candidate customers for the bulk generator.
pub trait CustomerSource {
    fn draw(&mut self) -> NewCustomer;
}

pub struct SyntheticCustomers<R> {
    rng: R,
}

impl SyntheticCustomers<StdRng> {
    /// Same seed, same sequence.
    pub fn seeded(seed: u64) -> Self {
        SyntheticCustomers::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        SyntheticCustomers::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SyntheticCustomers<R> {
    pub fn new(rng: R) -> Self {
        SyntheticCustomers { rng }
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn person(&mut self) -> (&'static str, &'static str) {
        (self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    /// A full display name, occasionally with a title prefix or suffix.
    pub fn name(&mut self) -> String {
        let (first, last) = self.person();
        self.display_name(first, last)
    }

    fn display_name(&mut self, first: &str, last: &str) -> String {
        let roll: u8 = self.rng.gen_range(0..100);
        match roll {
            0..=7 => format!("{} {} {}", self.pick(PREFIXES), first, last),
            8..=11 => format!("{} {} {}", first, last, self.pick(SUFFIXES)),
            _ => format!("{} {}", first, last),
        }
    }

    /// An email address for a random person.
    pub fn email(&mut self) -> String {
        let (first, last) = self.person();
        self.email_for(first, last)
    }

    /// An email address built from `first` and `last`. Local parts come in several shapes so
    /// collisions stay rare.
    pub fn email_for(&mut self, first: &str, last: &str) -> String {
        let first = first.to_ascii_lowercase();
        let last = last.to_ascii_lowercase();
        let local = match self.rng.gen_range(0..6) {
            0 => format!("{}.{}", first, last),
            1 => format!("{}{}", first, last),
            2 => format!("{}{}", &first[..1], last),
            3 => format!("{}{}", last, self.rng.gen_range(1..100)),
            4 => format!("{}_{}{}", first, self.pick(WORDS), self.rng.gen_range(1..1000)),
            _ => format!("{}.{}{}", last, first, self.rng.gen_range(10..10_000)),
        };
        format!("{}@{}", local, self.pick(DOMAINS))
    }

    pub fn age(&mut self) -> i32 {
        self.rng.gen_range(AGE_RANGE)
    }
}

impl<R: Rng> CustomerSource for SyntheticCustomers<R> {
    fn draw(&mut self) -> NewCustomer {
        let (first, last) = self.person();
        NewCustomer {
            name: self.display_name(first, last),
            email: self.email_for(first, last),
            age: self.age(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::RequestValidator;

    #[test]
    fn drawn_customers_pass_validation() {
        let mut synth = SyntheticCustomers::seeded(42);
        for _ in 0..500 {
            let c = synth.draw();
            assert!(AGE_RANGE.contains(&c.age), "age {} out of range", c.age);
            RequestValidator::validate_new(&c).unwrap();
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SyntheticCustomers::seeded(7);
        let mut b = SyntheticCustomers::seeded(7);
        for _ in 0..50 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn ages_cover_both_bounds() {
        let mut synth = SyntheticCustomers::seeded(1);
        let ages: Vec<i32> = (0..5_000).map(|_| synth.age()).collect();
        assert_eq!(ages.iter().min(), Some(&18));
        assert_eq!(ages.iter().max(), Some(&80));
    }

    #[test]
    fn emails_are_lowercase_with_known_domain() {
        let mut synth = SyntheticCustomers::seeded(3);
        for _ in 0..200 {
            let email = synth.email();
            let (local, domain) = email.split_once('@').unwrap();
            assert!(!local.is_empty());
            assert!(DOMAINS.contains(&domain));
            assert_eq!(email, email.to_ascii_lowercase());
        }
    }

    #[test]
    fn email_uses_the_drawn_name() {
        let mut synth = SyntheticCustomers::seeded(11);
        for _ in 0..300 {
            let c = synth.draw();
            let words: Vec<&str> = c.name.split(' ').collect();
            let (first, last) = if PREFIXES.contains(&words[0]) {
                (words[1], words[2])
            } else {
                (words[0], words[1])
            };
            let local = c.email.split_once('@').unwrap().0;
            assert!(
                local.contains(&last.to_ascii_lowercase()) || local.contains(&first.to_ascii_lowercase()),
                "{} does not come from {}",
                c.email,
                c.name
            );
        }
    }
}
