//! Non-dominated sorting and crowding distance.
//!
//! Both primitives work on plain objective vectors so they can be tested
//! without building a population. [`rank_population`] applies them to
//! individuals in place.
//!
//! Reference: Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//! Algorithm: NSGA-II".

use crate::individual::Individual;
use crate::objective::ObjectiveVector;

/// Result of non-dominated sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fronts {
    /// Front index of every solution, 0 = non-dominated
    pub ranks: Vec<usize>,
    /// Solution indices grouped by front, each in ascending index order
    pub fronts: Vec<Vec<usize>>,
}

/// Fast non-dominated sort, O(M·P²).
///
/// Keeps a domination count and a list of dominated solutions per
/// solution, then peels fronts off one at a time.
pub fn non_dominated_sort(objectives: &[ObjectiveVector]) -> Fronts {
    let n = objectives.len();
    let mut domination_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if objectives[i].dominates(&objectives[j]) {
                dominates[i].push(j);
                domination_count[j] += 1;
            } else if objectives[j].dominates(&objectives[i]) {
                dominates[j].push(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut fronts = Vec::new();

    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominates[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len() + 1;
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    Fronts { ranks, fronts }
}

/// Crowding distance of every member of `front`, aligned with `front`.
///
/// Members with equal objectives form one point of the front. The lowest
/// index of each point carries its distance and the others get zero, so
/// clones of a boundary route cannot claim both ends of an objective.
///
/// Per objective the points are sorted by value, ties broken by solution
/// index. The two ends get infinity, interior points add the gap between
/// their neighbours normalized by the objective's range on the front.
pub fn crowding_distance(objectives: &[ObjectiveVector], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    let mut distances = vec![0.0f64; n];

    let points = distinct_points(objectives, front);
    let m = points.len();
    if m <= 2 {
        for &k in &points {
            distances[k] = f64::INFINITY;
        }
        return distances;
    }

    let mut order = points;
    for objective in 0..ObjectiveVector::COUNT {
        let value = |k: usize| objectives[front[k]].get(objective);
        order.sort_by(|&a, &b| value(a).total_cmp(&value(b)).then(front[a].cmp(&front[b])));

        let first = order[0];
        let last = order[m - 1];
        distances[first] = f64::INFINITY;
        distances[last] = f64::INFINITY;

        let range = value(last) - value(first);
        if range <= 0.0 {
            continue;
        }
        for k in 1..(m - 1) {
            let gap = value(order[k + 1]) - value(order[k - 1]);
            distances[order[k]] += gap / range;
        }
    }

    distances
}

/// Positions in `front` of the lowest-index member of every distinct
/// objective vector.
fn distinct_points(objectives: &[ObjectiveVector], front: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..front.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (&objectives[front[a]], &objectives[front[b]]);
        x.distance_km
            .total_cmp(&y.distance_km)
            .then(x.time_min.total_cmp(&y.time_min))
            .then(front[a].cmp(&front[b]))
    });
    order.dedup_by(|later, kept| objectives[front[*later]] == objectives[front[*kept]]);
    order
}

/// Assign rank and crowding distance to every individual.
///
/// Returns the fronts as index lists into `individuals`.
pub fn rank_population(individuals: &mut [Individual]) -> Vec<Vec<usize>> {
    let objectives: Vec<ObjectiveVector> = individuals.iter().map(|i| i.objectives).collect();
    let sorted = non_dominated_sort(&objectives);

    for (individual, &rank) in individuals.iter_mut().zip(&sorted.ranks) {
        individual.rank = rank;
    }
    for front in &sorted.fronts {
        let distances = crowding_distance(&objectives, front);
        for (&i, distance) in front.iter().zip(distances) {
            individuals[i].crowding_distance = distance;
        }
    }

    sorted.fronts
}
