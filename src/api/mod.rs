pub mod model_dto;
