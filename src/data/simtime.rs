use crate::error::*;

use rug::{Integer, Rational};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimTimeUnit {
    Fs, Ps, Ns, Us, Ms, S,
}

impl SimTimeUnit {
    pub fn from_string(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        match s {
            "s"  => Ok(Self::S ),
            "ms" => Ok(Self::Ms),
            "us" => Ok(Self::Us),
            "ns" => Ok(Self::Ns),
            "ps" => Ok(Self::Ps),
            "fs" => Ok(Self::Fs),
            _    => Err(Error::InvalidTime(s.to_string()))
        }
    }

    fn to_multiplier(&self) -> u64 {
        use SimTimeUnit::*;
        match self {
            S  => 1_000_000_000_000_000,
            Ms =>     1_000_000_000_000,
            Us =>         1_000_000_000,
            Ns =>             1_000_000,
            Ps =>                 1_000,
            Fs =>                     1
        }
    }
}


/// A quantity of simulated time, e.g. the `1ns` of a `$timescale` header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTime {
    value: u64,
    unit: SimTimeUnit,
}

impl SimTime {
    pub const fn new(v: u64, u: SimTimeUnit) -> Self {
        Self {
            value: v,
            unit: u,
        }
    }

    pub const fn from_ns(v: u64) -> Self {
        Self::new(v, SimTimeUnit::Ns)
    }

    /// Parse text such as `1ns`, `10 ps` or `100us`.
    pub fn parse(text: impl AsRef<str>) -> Result<Self> {
        let text = text.as_ref().trim();
        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidTime(text.to_string()))?;
        let (digits, unit) = text.split_at(split);

        let value = digits
            .parse::<u64>()
            .map_err(|_| Error::InvalidTime(text.to_string()))?;
        let unit = SimTimeUnit::from_string(unit.trim().to_lowercase())?;

        Ok(Self::new(value, unit))
    }

    fn to_bigint(&self) -> Integer {
        Integer::from(self.value) * self.unit.to_multiplier()
    }
}

impl std::ops::Mul<u64> for SimTime {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self::Output {
        Self {
            value: self.value.saturating_mul(rhs),
            unit: self.unit
        }
    }
}

impl std::ops::Div<SimTime> for SimTime {
    type Output = u64;

    /// Floor division. Saturates when the quotient does not fit.
    fn div(self, rhs: SimTime) -> Self::Output {
        let r = Rational::from((self.to_bigint(), rhs.to_bigint()));
        let (_, floor) = r.fract_floor(Integer::new());
        floor.to_u64().unwrap_or(u64::MAX)
    }
}
