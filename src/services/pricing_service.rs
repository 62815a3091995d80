use serde::Serialize;

/// Flat rate covering the first `BASE_HOURS` of a day's itinerary.
const BASE_RATE: i64 = 2000;
const BASE_HOURS: u32 = 3;
/// Every started hour beyond `BASE_HOURS`.
const ADDITIONAL_HOUR_RATE: i64 = 500;
/// Flat rate for a full single-day package, independent of hours.
const FULL_PACKAGE_RATE: i64 = 4000;
/// Flat rate for a full two-day package. Discounted versus pricing the two
/// days independently (4000 + day-2 hourly).
const TWO_DAY_PACKAGE_RATE: i64 = 7000;

/// Display decomposition of a single-day price. Derived from the same
/// computation as [`PricingService::price`]; the two never diverge.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub total: i64,
    pub is_full_package: bool,
    pub billed_hours: u32,
    pub base_rate: i64,
    pub additional_hours: u32,
    pub additional_cost: i64,
    /// What the other billing option would have cost.
    pub alternative_total: i64,
    /// Amount saved versus the alternative, 0 if the alternative is cheaper.
    pub savings: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MultiDayPriceBreakdown {
    pub total: i64,
    pub two_day_package: bool,
    pub days: Vec<PriceBreakdown>,
    /// Saved by the two-day flat rate versus pricing both days separately.
    pub savings: i64,
}

pub struct PricingService;

impl PricingService {
    /// Hours billed for an itinerary: always rounded up, so 181 minutes
    /// bills as 4 hours.
    pub fn billed_hours(total_minutes: u32) -> u32 {
        total_minutes.div_ceil(60)
    }

    fn hourly_price(total_minutes: u32) -> i64 {
        let hours = Self::billed_hours(total_minutes);
        if hours <= BASE_HOURS {
            BASE_RATE
        } else {
            BASE_RATE + i64::from(hours - BASE_HOURS) * ADDITIONAL_HOUR_RATE
        }
    }

    /// Price of a single-day itinerary.
    pub fn price(total_minutes: u32, is_full_package: bool) -> i64 {
        if is_full_package {
            FULL_PACKAGE_RATE
        } else {
            Self::hourly_price(total_minutes)
        }
    }

    /// Whether the full package would be strictly cheaper than hourly
    /// billing. Used to suggest the cheaper option, never to switch billing
    /// silently.
    pub fn is_full_package_better(total_minutes: u32) -> bool {
        FULL_PACKAGE_RATE < Self::hourly_price(total_minutes)
    }

    /// Whether the two-day flat rate would be strictly cheaper than billing
    /// both days hourly.
    pub fn is_two_day_package_better(day1_minutes: u32, day2_minutes: u32) -> bool {
        TWO_DAY_PACKAGE_RATE < Self::hourly_price(day1_minutes) + Self::hourly_price(day2_minutes)
    }

    /// Price of a one- or two-day itinerary. With both days present and the
    /// full package selected, the discounted two-day flat rate applies.
    /// Otherwise day 2 always bills hourly; the single-day package rate
    /// never extends to it on its own.
    pub fn multi_day_price(
        day1_minutes: u32,
        day2_minutes: Option<u32>,
        is_full_package: bool,
    ) -> i64 {
        match day2_minutes {
            Some(_) if is_full_package => TWO_DAY_PACKAGE_RATE,
            Some(day2) => Self::price(day1_minutes, false) + Self::price(day2, false),
            None => Self::price(day1_minutes, is_full_package),
        }
    }

    /// Display breakdown for a single day. Totals come from [`Self::price`].
    pub fn breakdown(total_minutes: u32, is_full_package: bool) -> PriceBreakdown {
        let total = Self::price(total_minutes, is_full_package);
        let hours = Self::billed_hours(total_minutes);
        let additional_hours = hours.saturating_sub(BASE_HOURS);
        let alternative_total = Self::price(total_minutes, !is_full_package);

        if is_full_package {
            PriceBreakdown {
                total,
                is_full_package: true,
                billed_hours: hours,
                base_rate: FULL_PACKAGE_RATE,
                additional_hours: 0,
                additional_cost: 0,
                alternative_total,
                savings: (alternative_total - total).max(0),
            }
        } else {
            PriceBreakdown {
                total,
                is_full_package: false,
                billed_hours: hours,
                base_rate: BASE_RATE,
                additional_hours,
                additional_cost: i64::from(additional_hours) * ADDITIONAL_HOUR_RATE,
                alternative_total,
                savings: (alternative_total - total).max(0),
            }
        }
    }

    /// Display breakdown for a one- or two-day itinerary. Totals come from
    /// [`Self::multi_day_price`].
    pub fn multi_day_breakdown(
        day1_minutes: u32,
        day2_minutes: Option<u32>,
        is_full_package: bool,
    ) -> MultiDayPriceBreakdown {
        let total = Self::multi_day_price(day1_minutes, day2_minutes, is_full_package);

        match day2_minutes {
            Some(day2) if is_full_package => {
                // Flat two-day rate; per-day hourly decomposition shown for
                // comparison against the undiscounted sum.
                let alternative = Self::price(day1_minutes, true) + Self::price(day2, false);
                MultiDayPriceBreakdown {
                    total,
                    two_day_package: true,
                    days: vec![
                        Self::breakdown(day1_minutes, false),
                        Self::breakdown(day2, false),
                    ],
                    savings: (alternative - total).max(0),
                }
            }
            Some(day2) => MultiDayPriceBreakdown {
                total,
                two_day_package: false,
                days: vec![
                    Self::breakdown(day1_minutes, false),
                    Self::breakdown(day2, false),
                ],
                savings: 0,
            },
            None => MultiDayPriceBreakdown {
                total,
                two_day_package: false,
                days: vec![Self::breakdown(day1_minutes, is_full_package)],
                savings: 0,
            },
        }
    }
}
