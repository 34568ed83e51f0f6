//! Named-axis array walkthrough.
//!
//! This example demonstrates the core functionality of naxis-core:
//! - Broadcasting arrays by axis name
//! - Mixing scalars, uncertain values and vectors in one expression
//! - Indexing with integers, slices and masks
//! - Lazy sequences and seeded random samples
//! - Interpolation and inverse lookup
//!
//! Run with:
//! ```bash
//! cargo run --example named_arrays
//! ```

use anyhow::Result;
use naxis_core::{
    broadcast_shapes, getitem, Array, ArrayMath, Cartesian2dVectorArray, CartesianVector,
    Comparison, HasShape, Interpolate, Item, LinearSpace, Materialize, NamedShape,
    NormalRandomSample, ScalarArray, SliceSpec, UncertainScalarArray, Unit, AXIS_DISTRIBUTION,
};
use std::collections::BTreeMap;

fn main() -> Result<()> {
    println!("=== naxis-core: Named Array Examples ===\n");

    // Example 1: Broadcasting by name
    example_broadcasting()?;

    // Example 2: Mixed kinds
    example_promotion()?;

    // Example 3: Indexing
    example_indexing()?;

    // Example 4: Interpolation and inverse lookup
    example_interpolation()?;

    println!("\n=== All examples completed successfully! ===");
    Ok(())
}

fn example_broadcasting() -> Result<()> {
    println!("--- Example 1: Broadcasting ---");

    let a = NamedShape::from_pairs([("x", 3), ("y", 1)])?;
    let b = NamedShape::from_pairs([("y", 4), ("z", 2)])?;
    println!("{} + {} -> {}", a, b, broadcast_shapes(&[&a, &b])?);

    let time = LinearSpace::new(
        ScalarArray::scalar(0.0).with_unit(Unit::second()),
        ScalarArray::scalar(2.0).with_unit(Unit::second()),
        "t",
        5,
    )?
    .explicit()?;
    let speed = ScalarArray::from_vec(vec![1.0, 3.0], &NamedShape::from_pairs([("car", 2)])?)?
        .with_unit(Unit::meter().div(&Unit::second()));
    let distance = speed.checked_mul(&time)?;
    println!("distance: {}", distance);

    println!();
    Ok(())
}

fn example_promotion() -> Result<()> {
    println!("--- Example 2: Promotion ---");

    let samples = NormalRandomSample::new(
        10.0,
        0.5,
        NamedShape::from_pairs([(AXIS_DISTRIBUTION, 1000)])?,
        Some(42),
    )?
    .explicit()?;
    let mass = UncertainScalarArray::new(ScalarArray::scalar(10.0), samples)?;
    println!("mass spread: {}", mass.std_distribution()?);

    let direction = Cartesian2dVectorArray::constant(0.6, 0.8);
    println!("|direction| = {}", direction.length()?);

    let scaled = 2.0_f64.try_mul(&direction)?;
    println!("2 * direction -> {}", scaled.type_name());

    let momentum = mass.try_mul(&2.0)?;
    println!("mass * 2 -> {}", momentum.type_name());

    println!();
    Ok(())
}

fn example_indexing() -> Result<()> {
    println!("--- Example 3: Indexing ---");

    let shape = NamedShape::from_pairs([("t", 6), ("c", 2)])?;
    let a: Array = ScalarArray::from_vec((0..12).map(f64::from).collect(), &shape)?.into();

    let row = getitem(&a, &Item::axes([("t", 3)]))?;
    println!("row 3 shape: {}", row.shape());

    let every_other = getitem(&a, &Item::axes([("t", SliceSpec::full().with_step(2))]))?;
    println!("every other row shape: {}", every_other.shape());

    let mask = a.compare(&Array::from(7.5), Comparison::Gt)?;
    let large = getitem(&a, &Item::mask(mask))?;
    println!("elements above 7.5: {}", large.size());

    println!();
    Ok(())
}

fn example_interpolation() -> Result<()> {
    println!("--- Example 4: Interpolation ---");

    let shape = NamedShape::from_pairs([("i", 5)])?;
    let table = ScalarArray::from_vec(vec![0.0, 1.0, 4.0, 9.0, 16.0], &shape)?;

    let item = BTreeMap::from([("i".to_string(), Array::from(2.5))]);
    let value = table.interp_linear(&item)?;
    println!("table(2.5) = {}", value.to_scalar()?);

    let index = table.index(&Array::from(6.5), None)?;
    println!("table(i) = 6.5 at i = {}", index["i"].to_scalar()?);

    Ok(())
}
