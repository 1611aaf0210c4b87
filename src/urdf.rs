//! Supports reading the link/joint hierarchy from URDF (optional)

extern crate sxd_document;

use std::fs::read_to_string;
use std::path::Path;
use regex::Regex;
use sxd_document::{dom, parser, QName};
use crate::description::{Geometry, JointData, JointLimits, JointType, LinkData, Origin,
                         RobotDescription, Visual};
use crate::parameter_error::ParameterError;

/// Reads the robot description from URDF file.
///
/// # Parameters
/// - `path`: the location of URDF file to load from.
///
/// # Returns
/// - The `RobotDescription` with all links and joints found, ready for `KinematicTree::new`.
///   Structural validation (single root, existing links, limits) is done there, not here.
///
/// # Example
/// ```
/// let description = rs_robot_state::urdf::description_from_urdf_file(
///     "src/tests/data/pan_tilt_camera.urdf").expect("Failed to read URDF");
/// println!("{} links", description.links.len());
/// ```
pub fn description_from_urdf_file<P: AsRef<Path>>(path: P) -> Result<RobotDescription, ParameterError> {
    let xml_content = read_to_string(path)?;
    description_from_urdf(&xml_content)
}

/// Parses URDF XML content into the link/joint hierarchy.
///
/// Each link keeps its first `<visual>` element (origin and geometry). Each joint keeps
/// type, parent and child links, origin, axis (`1 0 0` if not given) and position limits.
/// Limits can be given in radians or in the xacro form `${radians(degrees)}`. Limits of
/// continuous joints are ignored. Floating and planar joints are not supported.
pub fn description_from_urdf(xml_content: &str) -> Result<RobotDescription, ParameterError> {
    let package = parser::parse(xml_content)
        .map_err(|e| ParameterError::XmlProcessingError(format!("Failed to parse XML: {}", e)))?;
    let document = package.as_document();

    let robot = document.root().children().into_iter()
        .find_map(|e| e.element())
        .ok_or_else(|| ParameterError::XmlProcessingError("No root element found".into()))?;
    if robot.name() != QName::new("robot") {
        return Err(ParameterError::XmlProcessingError(
            format!("Root element is <{}>, expected <robot>", robot.name().local_part())));
    }

    let mut description = RobotDescription::new(optional_attribute(robot, "name").unwrap_or_default());
    let link_tag = QName::new("link");
    let joint_tag = QName::new("joint");

    for child in element_children(robot) {
        if child.name() == link_tag {
            description.links.push(read_link(child)?);
        } else if child.name() == joint_tag {
            description.joints.push(read_joint(child)?);
        }
    }

    Ok(description)
}

fn element_children<'d>(element: dom::Element<'d>) -> impl Iterator<Item = dom::Element<'d>> {
    element.children().into_iter().filter_map(|e| e.element())
}

fn child_element<'d>(element: dom::Element<'d>, tag: &str) -> Option<dom::Element<'d>> {
    let tag = QName::new(tag);
    element_children(element).find(|el| el.name() == tag)
}

fn optional_attribute(element: dom::Element, name: &str) -> Option<String> {
    element.attribute(name).map(|attr| attr.value().to_string())
}

fn attribute(element: dom::Element, name: &str) -> Result<String, ParameterError> {
    optional_attribute(element, name).ok_or_else(|| ParameterError::MissingField(
        format!("{} attribute of <{}>", name, element.name().local_part())))
}

/// Parses exactly N whitespace separated numbers.
fn parse_numbers<const N: usize>(value: &str, what: &str) -> Result<[f64; N], ParameterError> {
    let numbers: Vec<f64> = value.split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .map_err(|e| ParameterError::ParseError(format!("{} '{}': {}", what, value, e)))?;

    numbers.try_into().map_err(|numbers: Vec<f64>| ParameterError::ParseError(
        format!("{} '{}' must contain exactly {} values, found {}", what, value, N, numbers.len())))
}

fn read_origin(element: dom::Element) -> Result<Origin, ParameterError> {
    match child_element(element, "origin") {
        Some(origin) => Ok(Origin {
            xyz: origin.attribute("xyz")
                .map_or(Ok([0.0; 3]), |attr| parse_numbers(attr.value(), "origin xyz"))?,
            rpy: origin.attribute("rpy")
                .map_or(Ok([0.0; 3]), |attr| parse_numbers(attr.value(), "origin rpy"))?,
        }),
        None => Ok(Origin::default()),
    }
}

fn read_geometry(geometry: dom::Element) -> Result<Option<Geometry>, ParameterError> {
    let shape = match element_children(geometry).next() {
        Some(shape) => shape,
        None => return Ok(None),
    };
    let number = |name: &str| -> Result<f64, ParameterError> {
        let [value] = parse_numbers::<1>(&attribute(shape, name)?, name)?;
        Ok(value)
    };

    let geometry = match shape.name().local_part() {
        "mesh" => Geometry::Mesh {
            filename: attribute(shape, "filename")?,
            scale: shape.attribute("scale")
                .map_or(Ok([1.0; 3]), |attr| parse_numbers(attr.value(), "mesh scale"))?,
        },
        "box" => Geometry::Box { size: parse_numbers(&attribute(shape, "size")?, "box size")? },
        "cylinder" => Geometry::Cylinder { radius: number("radius")?, length: number("length")? },
        "sphere" => Geometry::Sphere { radius: number("radius")? },
        other => return Err(ParameterError::ParseError(format!("Unknown geometry <{}>", other))),
    };
    Ok(Some(geometry))
}

fn read_link(element: dom::Element) -> Result<LinkData, ParameterError> {
    let mut link = LinkData::new(attribute(element, "name")?);

    if let Some(visual) = child_element(element, "visual") {
        if let Some(geometry) = child_element(visual, "geometry") {
            if let Some(geometry) = read_geometry(geometry)? {
                link.visual = Some(Visual { origin: read_origin(visual)?, geometry });
            }
        }
    }
    Ok(link)
}

fn read_joint(element: dom::Element) -> Result<JointData, ParameterError> {
    let name = attribute(element, "name")?;
    let joint_type = match attribute(element, "type")?.as_str() {
        "revolute" => JointType::Revolute,
        "prismatic" => JointType::Prismatic,
        "continuous" => JointType::Continuous,
        "fixed" => JointType::Fixed,
        unsupported @ ("floating" | "planar") =>
            return Err(ParameterError::UnsupportedJointType(format!("{} ({})", unsupported, name))),
        other => return Err(ParameterError::ParseError(
            format!("Unknown joint type {} of joint {}", other, name))),
    };

    let link_of = |tag: &str| -> Result<String, ParameterError> {
        let link = child_element(element, tag).ok_or_else(|| ParameterError::MissingField(
            format!("<{}> of joint {}", tag, name)))?;
        attribute(link, "link")
    };
    let parent = link_of("parent")?;
    let child = link_of("child")?;

    let axis = match child_element(element, "axis") {
        Some(axis) => parse_numbers(&attribute(axis, "xyz")?, "axis xyz")?,
        None => [1.0, 0.0, 0.0],
    };

    let limits = match (joint_type, child_element(element, "limit")) {
        (JointType::Revolute | JointType::Prismatic, Some(limit)) => Some(get_limits(limit)?),
        _ => None,
    };

    Ok(JointData {
        origin: read_origin(element)?,
        name,
        joint_type,
        parent,
        child,
        axis,
        limits,
    })
}

fn parse_angle(attr_value: &str) -> Result<f64, ParameterError> {
    // Regular expression to match the ${radians(<number>)} format that is common in xacro
    let re = Regex::new(r"^\$\{radians\((-?\d+(\.\d+)?)\)\}$")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;

    if let Some(caps) = re.captures(attr_value.trim()) {
        let degrees_str = caps.get(1)
            .ok_or_else(|| ParameterError::WrongAngle(format!("Bad representation: {}", attr_value)))?
            .as_str();
        let degrees: f64 = degrees_str.parse()
            .map_err(|_| ParameterError::WrongAngle(attr_value.to_string()))?;
        Ok(degrees.to_radians())
    } else {
        // Plain number, radians (or meters for prismatic joints)
        attr_value.trim().parse()
            .map_err(|_| ParameterError::WrongAngle(attr_value.to_string()))
    }
}

/// Missing lower or upper attribute means 0, as in URDF.
fn get_limits(element: dom::Element) -> Result<JointLimits, ParameterError> {
    let limit = |name: &str| element.attribute(name)
        .map_or(Ok(0.0), |attr| parse_angle(attr.value()));
    Ok(JointLimits::new(limit("lower")?, limit("upper")?))
}
