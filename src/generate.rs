use std::{fs::File, io::{self, BufWriter, Write}};

use clap::Args;
use rand::{distributions::WeightedIndex, Rng};
use rand_distr::{Distribution, Exp, Uniform};
use thiserror::Error;

use crate::{seed::seeded_rng, workload::{AircraftClass, Workload, WorkloadEntry}};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid generator parameters: {0}")]
    Invalid(String),
    #[error("cannot write workload: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Args)]
pub struct WorkloadGenerator {
    /// An optional seed to kickstart the workload generation
    #[clap(short='s', long)]
    seed: Option<u128>,
    /// The number of aircrafts
    #[clap(short='n', long, default_value="20")]
    nb_aircrafts: usize,
    /// Relative weight of commercial aircrafts
    #[clap(long, default_value="5")]
    commercial_weight: u32,
    /// Relative weight of cargo aircrafts
    #[clap(long, default_value="4")]
    cargo_weight: u32,
    /// Relative weight of emergency aircrafts
    #[clap(long, default_value="1")]
    emergency_weight: u32,
    /// The average time between two aircraft arrivals
    #[clap(long, default_value="2")]
    avg_interarrival_time: f64,
    /// The minimum time an aircraft spends on the runway
    #[clap(long, default_value="1")]
    min_runway_time: u64,
    /// The maximum time an aircraft spends on the runway
    #[clap(long, default_value="5")]
    max_runway_time: u64,
    /// Name of the file where to generate the workload
    #[clap(short, long)]
    output: Option<String>,
}

impl WorkloadGenerator {

    pub fn generate(&self) -> Result<(), GenerateError> {
        let workload = self.generate_workload()?;

        match self.output.as_ref() {
            Some(output) => {
                let mut out = BufWriter::new(File::create(output)?);
                workload.write_to(&mut out)?;
                out.flush()?;
            },
            None => workload.write_to(&mut io::stdout().lock())?,
        }
        Ok(())
    }

    pub fn generate_workload(&self) -> Result<Workload, GenerateError> {
        if self.min_runway_time > self.max_runway_time {
            return Err(GenerateError::Invalid(format!(
                "min runway time {} exceeds max runway time {}", self.min_runway_time, self.max_runway_time)));
        }

        let mut rng = seeded_rng(self.seed);
        let classes = self.generate_classes(&mut rng)?;
        let arrivals = self.generate_arrivals(&mut rng)?;
        let runway_times = self.generate_runway_times(&mut rng);

        let entries = classes.into_iter().zip(arrivals).zip(runway_times)
            .map(|((class, arrival), runway_time)| WorkloadEntry { class, arrival, runway_time })
            .collect();

        Ok(Workload { entries })
    }

    fn generate_classes(&self, rng: &mut impl Rng) -> Result<Vec<AircraftClass>, GenerateError> {
        let weights = [self.commercial_weight, self.cargo_weight, self.emergency_weight];
        let rand_class = WeightedIndex::<u32>::new(weights)
            .map_err(|e| GenerateError::Invalid(format!("class weights: {e}")))?;

        Ok((0..self.nb_aircrafts).map(|_| AircraftClass::ALL[rand_class.sample(rng)]).collect())
    }

    /// Inter-arrival delays follow an exponential law; the first aircraft arrives immediately.
    fn generate_arrivals(&self, rng: &mut impl Rng) -> Result<Vec<u64>, GenerateError> {
        if self.avg_interarrival_time <= 0.0 {
            return Ok(vec![0; self.nb_aircrafts]);
        }
        let rand_gap = Exp::new(1.0 / self.avg_interarrival_time)
            .map_err(|e| GenerateError::Invalid(format!("interarrival time: {e}")))?;

        let mut arrivals = vec![];
        for i in 0..self.nb_aircrafts {
            if i == 0 {
                arrivals.push(0);
            } else {
                arrivals.push(rand_gap.sample(rng).round() as u64);
            }
        }
        Ok(arrivals)
    }

    fn generate_runway_times(&self, rng: &mut impl Rng) -> Vec<u64> {
        let rand_time = Uniform::new_inclusive(self.min_runway_time, self.max_runway_time);
        (0..self.nb_aircrafts).map(|_| rand_time.sample(rng)).collect()
    }

}
