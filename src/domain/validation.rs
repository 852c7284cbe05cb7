/// Intake Validator - Input Validation
///
/// Checks order and rider records before they reach the batching engine.
/// The engine itself assumes well-formed input; anything rejected here is an
/// `InvalidInput` case reported back to the intake collaborator.
///
/// ## Validation Rules
/// - Kitchen and rider coordinates must be finite
/// - Coordinates must stay within the configured plane bounds
/// - Ready time must not exceed the configured maximum
/// - Order identity must not already be registered
///
/// ## Usage
/// ```rust,ignore
/// use delivery_batcher::domain::validation::OrderValidator;
///
/// let validator = OrderValidator::new();
/// match validator.validate(&request) {
///     Ok(()) => println!("Order is valid"),
///     Err(e) => println!("Validation error: {}", e),
/// }
/// ```

use crate::domain::registry::OrderRegistry;
use crate::shared::geometry::Location;
use crate::shared::protocol::{NewOrderRequest, OrderId, ReadyTime, RiderSpec};

/// Validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Coordinate is NaN or infinite
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Coordinate outside the plane bounds
    #[error("Location out of range: {0}")]
    LocationOutOfRange(String),

    /// Ready time beyond the configured horizon
    #[error("Ready time out of range: {0}")]
    ReadyTimeOutOfRange(String),

    /// Order identity already registered
    #[error("Duplicate order id: {0}")]
    DuplicateOrderId(OrderId),
}

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Largest allowed absolute coordinate on either axis
    pub max_abs_coordinate: f64,

    /// Latest allowed ready time (inclusive)
    pub max_ready_time: ReadyTime,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_abs_coordinate: 1_000_000.0,
            max_ready_time: ReadyTime::MAX,
        }
    }
}

/// Intake validator
pub struct OrderValidator {
    config: ValidationConfig,
}

impl OrderValidator {
    /// Creates a new validator with default configuration
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Creates a new validator with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validates an order request on its own
    pub fn validate(&self, request: &NewOrderRequest) -> Result<(), ValidationError> {
        self.validate_location("kitchen", request.kitchen_location)?;
        self.validate_ready_time(request.ready_time)?;
        Ok(())
    }

    /// Validates an order request against the orders already registered
    pub fn validate_against(
        &self,
        request: &NewOrderRequest,
        registry: &OrderRegistry,
    ) -> Result<(), ValidationError> {
        self.validate(request)?;
        if registry.contains(request.order_id) {
            return Err(ValidationError::DuplicateOrderId(request.order_id));
        }
        Ok(())
    }

    /// Validates a roster entry
    pub fn validate_rider(&self, rider: &RiderSpec) -> Result<(), ValidationError> {
        self.validate_location("rider", rider.location)
    }

    fn validate_location(&self, what: &str, location: Location) -> Result<(), ValidationError> {
        if !location.is_finite() {
            return Err(ValidationError::InvalidLocation(format!(
                "{} location {} is not finite",
                what, location
            )));
        }

        let limit = self.config.max_abs_coordinate;
        if location.x.abs() > limit || location.y.abs() > limit {
            return Err(ValidationError::LocationOutOfRange(format!(
                "{} location {} exceeds ±{}",
                what, location, limit
            )));
        }

        Ok(())
    }

    fn validate_ready_time(&self, ready_time: ReadyTime) -> Result<(), ValidationError> {
        if ready_time > self.config.max_ready_time {
            return Err(ValidationError::ReadyTimeOutOfRange(format!(
                "Ready time {} exceeds maximum {}",
                ready_time, self.config.max_ready_time
            )));
        }
        Ok(())
    }
}

impl Default for OrderValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Order;

    fn create_valid_order() -> NewOrderRequest {
        NewOrderRequest {
            order_id: 1,
            kitchen_id: 1,
            customer_id: 1,
            ready_time: 10,
            kitchen_location: Location::new(1.0, 2.0),
        }
    }

    #[test]
    fn test_valid_order() {
        let validator = OrderValidator::new();
        assert!(validator.validate(&create_valid_order()).is_ok());
    }

    #[test]
    fn test_nan_location() {
        let validator = OrderValidator::new();
        let mut order = create_valid_order();
        order.kitchen_location = Location::new(f64::NAN, 0.0);

        let result = validator.validate(&order);
        assert!(matches!(result.unwrap_err(), ValidationError::InvalidLocation(_)));
    }

    #[test]
    fn test_location_out_of_range() {
        let config = ValidationConfig {
            max_abs_coordinate: 10.0,
            ..Default::default()
        };
        let validator = OrderValidator::with_config(config);

        let mut order = create_valid_order();
        order.kitchen_location = Location::new(0.0, -10.5);
        assert!(matches!(
            validator.validate(&order).unwrap_err(),
            ValidationError::LocationOutOfRange(_)
        ));

        // 边界值允许
        order.kitchen_location = Location::new(10.0, -10.0);
        assert!(validator.validate(&order).is_ok());
    }

    #[test]
    fn test_ready_time_out_of_range() {
        let config = ValidationConfig {
            max_ready_time: 1440,
            ..Default::default()
        };
        let validator = OrderValidator::with_config(config);

        let mut order = create_valid_order();
        order.ready_time = 1441;
        assert!(matches!(
            validator.validate(&order).unwrap_err(),
            ValidationError::ReadyTimeOutOfRange(_)
        ));
    }

    #[test]
    fn test_duplicate_order_id() {
        let validator = OrderValidator::new();
        let mut registry = OrderRegistry::new();
        registry.insert(Order::from(create_valid_order())).unwrap();

        assert_eq!(
            validator.validate_against(&create_valid_order(), &registry),
            Err(ValidationError::DuplicateOrderId(1))
        );

        let mut fresh = create_valid_order();
        fresh.order_id = 2;
        assert!(validator.validate_against(&fresh, &registry).is_ok());
    }

    #[test]
    fn test_rider_location() {
        let validator = OrderValidator::new();
        let rider = RiderSpec {
            rider_id: 1,
            location: Location::new(0.0, f64::INFINITY),
        };
        assert!(matches!(
            validator.validate_rider(&rider).unwrap_err(),
            ValidationError::InvalidLocation(_)
        ));
    }
}
