//! Shared proptest strategies

use crate::types::RawMetrics;
use proptest::prelude::*;

prop_compose! {
    /// Metrics inside every field bound, with completed <= planned
    pub(crate) fn valid_metrics()(
        calories in 0i64..=5000,
        hydration in 0.0f64..=5.0,
        sleep in 0.0f64..=12.0,
        diet in 0i64..=100,
        steps in 0i64..=50_000,
        exercise in 0i64..=300,
        home in 0i64..=21,
        takeout in 0i64..=21,
        grocery in 0.0f64..1000.0,
        planned in 1i64..=50,
    )(
        completed in 0i64..=planned,
        calories in Just(calories),
        hydration in Just(hydration),
        sleep in Just(sleep),
        diet in Just(diet),
        steps in Just(steps),
        exercise in Just(exercise),
        home in Just(home),
        takeout in Just(takeout),
        grocery in Just(grocery),
        planned in Just(planned),
    ) -> RawMetrics {
        RawMetrics {
            date: None,
            calories,
            hydration_liters: hydration,
            sleep_hours: sleep,
            diet_quality: diet,
            daily_steps: steps,
            exercise_minutes: exercise,
            home_cooked_meals: home,
            takeout_meals: takeout,
            grocery_dollars: grocery,
            study_blocks_planned: planned,
            study_blocks_completed: completed,
        }
    }
}
