use rand::{Rng, seq::IndexedRandom};

use crate::{
    BatchError,
    core::item::{Profile, ProfileGenerator},
};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Christopher", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark",
    "Margaret", "Donald", "Sandra", "Steven", "Ashley", "Paul", "Kimberly", "Andrew", "Emily",
    "Joshua", "Donna", "Kenneth", "Michelle", "Kevin", "Carol", "Brian", "Amanda", "George",
    "Dorothy", "Timothy", "Melissa", "Ronald", "Deborah", "Edward", "Stephanie", "Jason",
    "Rebecca", "Jeffrey", "Sharon", "Ryan", "Laura", "Jacob", "Cynthia", "Gary", "Kathleen",
    "Nicholas", "Amy", "Eric", "Angela", "Jonathan", "Shirley", "Stephen", "Anna", "Larry",
    "Brenda",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans",
    "Turner", "Diaz", "Parker", "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris",
    "Morales", "Murphy",
];

const COMPANIES: &[&str] = &[
    "TechCorp",
    "Innovate Solutions",
    "Global Systems",
    "Digital Dynamics",
    "Quantum Industries",
    "NextGen Technologies",
    "Fusion Enterprises",
    "Vertex Corp",
    "Axiom Systems",
    "Pinnacle Group",
    "Catalyst Inc",
    "Horizon Technologies",
    "Stellar Solutions",
    "Momentum Corp",
    "Velocity Systems",
    "Nexus Enterprises",
    "Summit Industries",
    "Apex Corporation",
    "Prime Technologies",
    "Zenith Group",
    "Vanguard Systems",
    "Odyssey Corp",
    "Atlas Technologies",
    "Frontier Solutions",
    "Titan Industries",
    "Phoenix Enterprises",
    "Spectrum Corp",
    "Infinity Systems",
    "Meridian Group",
    "Eclipse Technologies",
];

const JOB_TITLES: &[&str] = &[
    "Software Engineer",
    "Product Manager",
    "Data Analyst",
    "UX Designer",
    "Marketing Manager",
    "Sales Representative",
    "Project Manager",
    "Business Analyst",
    "DevOps Engineer",
    "HR Manager",
    "Financial Analyst",
    "Customer Success Manager",
    "Operations Manager",
    "Quality Assurance Engineer",
    "Content Writer",
    "Accountant",
    "Legal Counsel",
    "Systems Administrator",
    "Network Engineer",
    "Database Administrator",
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "Mobile Developer",
    "Security Analyst",
    "Research Scientist",
    "Technical Writer",
    "Business Development Manager",
    "Product Designer",
    "Solutions Architect",
];

/// Formats a North American style number `+1-AAA-PPP-LLLL`.
///
/// `AAA` and `PPP` are drawn from `[200, 999]`, `LLLL` from `[1000, 9999]`,
/// each uniformly and independently.
pub fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let area_code: u16 = rng.random_range(200..=999);
    let prefix: u16 = rng.random_range(200..=999);
    let line_number: u16 = rng.random_range(1000..=9999);
    format!("+1-{area_code}-{prefix}-{line_number}")
}

fn pick<'p, R: Rng + ?Sized>(pool: &'p [String], rng: &mut R) -> &'p str {
    pool.choose(rng).map(String::as_str).unwrap_or_default()
}

/// Profile generator drawing from fixed sample pools.
///
/// Each field is drawn independently and uniformly. The generator holds no
/// mutable state: every call uses the calling thread's RNG.
#[derive(Debug, Clone)]
pub struct RandomProfileGenerator {
    first_names: Vec<String>,
    last_names: Vec<String>,
    companies: Vec<String>,
    job_titles: Vec<String>,
}

impl Default for RandomProfileGenerator {
    fn default() -> Self {
        Self {
            first_names: to_pool(FIRST_NAMES),
            last_names: to_pool(LAST_NAMES),
            companies: to_pool(COMPANIES),
            job_titles: to_pool(JOB_TITLES),
        }
    }
}

fn to_pool(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl RandomProfileGenerator {
    /// Returns a freshly randomized profile.
    pub fn next(&self) -> Profile {
        self.next_with_rng(&mut rand::rng())
    }

    /// Same as [`next`](Self::next) with a caller-provided RNG, for
    /// reproducible sequences.
    pub fn next_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Profile {
        let full_name = format!(
            "{} {}",
            pick(&self.first_names, rng),
            pick(&self.last_names, rng)
        );

        Profile::new(
            full_name,
            phone_number(rng),
            pick(&self.companies, rng),
            pick(&self.job_titles, rng),
        )
    }
}

impl ProfileGenerator for RandomProfileGenerator {
    fn next_profile(&self) -> Result<Profile, BatchError> {
        Ok(self.next())
    }
}

/// Builder for a [`RandomProfileGenerator`] with custom pools.
///
/// Pools left unset keep their built-in sample values.
#[derive(Default)]
pub struct RandomProfileGeneratorBuilder {
    first_names: Option<Vec<String>>,
    last_names: Option<Vec<String>>,
    companies: Option<Vec<String>>,
    job_titles: Option<Vec<String>>,
}

impl RandomProfileGeneratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_names(mut self, first_names: Vec<String>) -> Self {
        self.first_names = Some(first_names);
        self
    }

    pub fn last_names(mut self, last_names: Vec<String>) -> Self {
        self.last_names = Some(last_names);
        self
    }

    pub fn companies(mut self, companies: Vec<String>) -> Self {
        self.companies = Some(companies);
        self
    }

    pub fn job_titles(mut self, job_titles: Vec<String>) -> Self {
        self.job_titles = Some(job_titles);
        self
    }

    /// # Errors
    ///
    /// Fails with [`BatchError::ItemReader`] when a pool is empty.
    pub fn build(self) -> Result<RandomProfileGenerator, BatchError> {
        let defaults = RandomProfileGenerator::default();

        Ok(RandomProfileGenerator {
            first_names: non_empty("first names", self.first_names, defaults.first_names)?,
            last_names: non_empty("last names", self.last_names, defaults.last_names)?,
            companies: non_empty("companies", self.companies, defaults.companies)?,
            job_titles: non_empty("job titles", self.job_titles, defaults.job_titles)?,
        })
    }
}

fn non_empty(
    label: &str,
    pool: Option<Vec<String>>,
    default: Vec<String>,
) -> Result<Vec<String>, BatchError> {
    match pool {
        Some(pool) if pool.is_empty() => Err(BatchError::ItemReader(format!(
            "the pool of {label} is empty"
        ))),
        Some(pool) => Ok(pool),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use rand::{SeedableRng, rngs::StdRng};

    use crate::{BatchError, core::item::ProfileGenerator};

    use super::{
        COMPANIES, JOB_TITLES, RandomProfileGenerator, RandomProfileGeneratorBuilder,
        phone_number,
    };

    fn phone_groups(phone: &str) -> (u32, u32, u32) {
        let rest = phone.strip_prefix("+1-").expect("missing +1- prefix");
        let groups: Vec<&str> = rest.split('-').collect();
        assert_eq!(groups.len(), 3, "unexpected phone {phone}");
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 3);
        assert_eq!(groups[2].len(), 4);
        assert!(groups.iter().all(|g| g.chars().all(|c| c.is_ascii_digit())));
        (
            groups[0].parse().unwrap(),
            groups[1].parse().unwrap(),
            groups[2].parse().unwrap(),
        )
    }

    #[test]
    fn full_name_should_have_first_and_last_name() {
        let generator = RandomProfileGenerator::default();
        let profile = generator.next();

        let parts: Vec<&str> = profile.full_name().split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|part| !part.is_empty()));
    }

    #[test]
    fn company_and_job_title_should_come_from_pools() {
        let generator = RandomProfileGenerator::default();
        for _ in 0..100 {
            let profile = generator.next();
            assert!(COMPANIES.iter().any(|company| *company == profile.company()));
            assert!(JOB_TITLES.iter().any(|title| *title == profile.job_title()));
        }
    }

    #[test]
    fn phone_groups_should_stay_in_range() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let (area_code, prefix, line_number) = phone_groups(&phone_number(&mut rng));
            assert!((200..=999).contains(&area_code));
            assert!((200..=999).contains(&prefix));
            assert!((1000..=9999).contains(&line_number));
        }
    }

    #[test]
    fn phone_numbers_should_cover_the_full_range() {
        let mut rng = rand::rng();
        let mut area_codes = HashSet::new();
        let mut line_numbers = HashSet::new();

        for _ in 0..3000 {
            let (area_code, _, line_number) = phone_groups(&phone_number(&mut rng));
            area_codes.insert(area_code);
            line_numbers.insert(line_number);
        }

        assert!(area_codes.iter().any(|code| *code >= 990));
        assert!(line_numbers.iter().any(|line| *line >= 9990));
        assert!(area_codes.len() > 500, "{} area codes", area_codes.len());
        assert!(line_numbers.len() > 2500, "{} line numbers", line_numbers.len());
    }

    #[test]
    fn generated_profiles_should_be_diverse() {
        let generator = RandomProfileGenerator::default();
        let mut names = HashSet::new();
        let mut phones = HashSet::new();

        for _ in 0..50 {
            let profile = generator.next();
            names.insert(profile.full_name().to_string());
            phones.insert(profile.phone_number().to_string());
        }

        assert!(names.len() > 10);
        assert!(phones.len() > 40);
    }

    #[test]
    fn seeded_rng_should_reproduce_profiles() {
        let generator = RandomProfileGenerator::default();
        let first = generator.next_with_rng(&mut StdRng::seed_from_u64(42));
        let second = generator.next_with_rng(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn generator_should_be_usable_from_many_threads() {
        let generator = Arc::new(RandomProfileGenerator::default());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || {
                    (0..10)
                        .map(|_| generator.next_profile().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let profiles: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(profiles.len(), 100);
        assert!(profiles.iter().all(|profile| {
            !profile.full_name().is_empty()
                && profile.phone_number().starts_with("+1-")
                && !profile.company().is_empty()
                && !profile.job_title().is_empty()
        }));
    }

    #[test]
    fn builder_should_use_custom_pools() -> Result<(), BatchError> {
        let generator = RandomProfileGeneratorBuilder::new()
            .first_names(vec!["Ada".to_string()])
            .last_names(vec!["Lovelace".to_string()])
            .companies(vec!["Analytical Engines".to_string()])
            .build()?;

        let profile = generator.next();
        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert_eq!(profile.company(), "Analytical Engines");
        assert!(JOB_TITLES.iter().any(|title| *title == profile.job_title()));
        Ok(())
    }

    #[test]
    fn builder_should_reject_empty_pools() {
        let result = RandomProfileGeneratorBuilder::new()
            .job_titles(Vec::new())
            .build();

        assert_eq!(
            result.unwrap_err(),
            BatchError::ItemReader("the pool of job titles is empty".to_string())
        );
    }
}
