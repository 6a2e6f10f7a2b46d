//! Piecewise-linear curves mapping raw metric values onto the 0-100 scale.
//!
//! Each curve is a small table: a full-marks bound, three interior bands
//! scanned from best to worst, and a tail that decays toward (and clamps at)
//! zero. The first band whose bound the value reaches wins.

use super::metrics::MetricKey;

/// Whether a larger raw value is better or worse for an investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl Direction {
    /// True when `x` is at or on the good side of `bound`.
    pub fn reaches(self, x: f64, bound: f64) -> bool {
        match self {
            Direction::HigherBetter => x >= bound,
            Direction::LowerBetter => x <= bound,
        }
    }

    /// Distance from `bound` measured toward the good side.
    fn offset(self, x: f64, bound: f64) -> f64 {
        match self {
            Direction::HigherBetter => x - bound,
            Direction::LowerBetter => bound - x,
        }
    }
}

/// One linear segment: `base` at `bound`, moving `slope` points per unit
/// toward the good side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub bound: f64,
    pub base: f64,
    pub slope: f64,
}

impl Band {
    const fn new(bound: f64, base: f64, slope: f64) -> Self {
        Self { bound, base, slope }
    }

    pub fn value_at(&self, direction: Direction, x: f64) -> f64 {
        self.base + self.slope * direction.offset(x, self.bound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub direction: Direction,
    /// Values at or beyond this bound score 100
    pub full_marks: f64,
    pub bands: [Band; 3],
    /// Anchored at the last band's bound; clamped at 0
    pub tail: Band,
}

impl Curve {
    pub fn score(&self, x: f64) -> f64 {
        if self.direction.reaches(x, self.full_marks) {
            return 100.0;
        }
        for band in &self.bands {
            if self.direction.reaches(x, band.bound) {
                return band.value_at(self.direction, x);
            }
        }
        // f64::max also maps a NaN tail value to 0
        self.tail.value_at(self.direction, x).max(0.0)
    }

    /// Every bound where two segments meet, best first.
    pub fn breakpoints(&self) -> Vec<f64> {
        std::iter::once(self.full_marks)
            .chain(self.bands.iter().map(|b| b.bound))
            .collect()
    }
}

pub const POPULATION_GROWTH: Curve = Curve {
    direction: Direction::HigherBetter,
    full_marks: 3.0,
    bands: [
        Band::new(2.0, 85.0, 15.0),
        Band::new(1.0, 65.0, 20.0),
        Band::new(0.0, 40.0, 25.0),
    ],
    tail: Band::new(0.0, 40.0, 20.0),
};

pub const RENTAL_YIELD: Curve = Curve {
    direction: Direction::HigherBetter,
    full_marks: 7.0,
    bands: [
        Band::new(5.0, 85.0, 7.5),
        Band::new(3.0, 60.0, 12.5),
        Band::new(1.0, 30.0, 15.0),
    ],
    // 30 + 30(x - 1) == 30x
    tail: Band::new(1.0, 30.0, 30.0),
};

pub const SUPPLY_RATIO: Curve = Curve {
    direction: Direction::LowerBetter,
    full_marks: 3.0,
    bands: [
        Band::new(5.0, 85.0, 7.5),
        Band::new(8.0, 60.0, 25.0 / 3.0),
        Band::new(12.0, 30.0, 7.5),
    ],
    tail: Band::new(12.0, 30.0, 5.0),
};

pub const VACANCY_RATE: Curve = Curve {
    direction: Direction::LowerBetter,
    full_marks: 1.5,
    bands: [
        Band::new(2.5, 85.0, 15.0),
        Band::new(4.0, 60.0, 50.0 / 3.0),
        Band::new(6.0, 30.0, 15.0),
    ],
    tail: Band::new(6.0, 30.0, 10.0),
};

pub const MORTGAGE_STRESS: Curve = Curve {
    direction: Direction::LowerBetter,
    full_marks: 15.0,
    bands: [
        Band::new(25.0, 85.0, 1.5),
        Band::new(35.0, 60.0, 2.5),
        Band::new(45.0, 30.0, 3.0),
    ],
    tail: Band::new(45.0, 30.0, 3.0),
};

/// The curve used for `key`.
pub fn curve_for(key: MetricKey) -> &'static Curve {
    match key {
        MetricKey::PopulationGrowth => &POPULATION_GROWTH,
        MetricKey::RentalYield => &RENTAL_YIELD,
        MetricKey::SupplyRatio => &SUPPLY_RATIO,
        MetricKey::VacancyRate => &VACANCY_RATE,
        MetricKey::MortgageStress => &MORTGAGE_STRESS,
    }
}

pub fn score_metric(key: MetricKey, value: f64) -> f64 {
    curve_for(key).score(value)
}

/// Annual population growth (%), higher is better.
pub fn score_population_growth(growth_rate: f64) -> f64 {
    POPULATION_GROWTH.score(growth_rate)
}

/// Gross rental yield (%), higher is better.
pub fn score_rental_yield(yield_rate: f64) -> f64 {
    RENTAL_YIELD.score(yield_rate)
}

/// New dwelling supply as a share of existing stock (%), lower is better.
pub fn score_supply_ratio(supply_ratio: f64) -> f64 {
    SUPPLY_RATIO.score(supply_ratio)
}

/// Rental vacancy rate (%), lower is better.
pub fn score_vacancy_rate(vacancy_rate: f64) -> f64 {
    VACANCY_RATE.score(vacancy_rate)
}

/// Share of household income spent on mortgage repayments (%), lower is better.
pub fn score_mortgage_stress(stress_ratio: f64) -> f64 {
    MORTGAGE_STRESS.score(stress_ratio)
}
